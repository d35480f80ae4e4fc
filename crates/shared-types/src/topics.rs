//! # Topic Contract
//!
//! The fixed request/response topic pairs, shared by the caller-side
//! bridge and the db-processor. Established once at process startup and
//! never modified at runtime.

/// A request topic and the response topic its handler replies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicPair {
    pub request: &'static str,
    pub response: &'static str,
}

pub const BALANCE_QUERY: TopicPair = TopicPair {
    request: "balance-query-request",
    response: "balance-query-response",
};

pub const TRADE_CREATE: TopicPair = TopicPair {
    request: "trade-create-request",
    response: "trade-create-response",
};

pub const TRADE_CLOSE: TopicPair = TopicPair {
    request: "trade-close-request",
    response: "trade-close-response",
};

pub const HOLDINGS_QUERY: TopicPair = TopicPair {
    request: "holdings-query-request",
    response: "holdings-query-response",
};

pub const USER_EXISTENCE: TopicPair = TopicPair {
    request: "user-existence-check",
    response: "user-existence-response",
};

pub const USER_CREATION: TopicPair = TopicPair {
    request: "user-creation-request",
    response: "user-creation-response",
};

pub const USER_AUTHENTICATION: TopicPair = TopicPair {
    request: "user-authentication-request",
    response: "user-authentication-response",
};

/// Every correlated pair, in one place.
pub const ALL_PAIRS: [TopicPair; 7] = [
    BALANCE_QUERY,
    TRADE_CREATE,
    TRADE_CLOSE,
    HOLDINGS_QUERY,
    USER_EXISTENCE,
    USER_CREATION,
    USER_AUTHENTICATION,
];

/// The fixed response-topic set the correlator consumes.
pub const RESPONSE_TOPICS: [&str; 7] = [
    BALANCE_QUERY.response,
    TRADE_CREATE.response,
    TRADE_CLOSE.response,
    HOLDINGS_QUERY.response,
    USER_EXISTENCE.response,
    USER_CREATION.response,
    USER_AUTHENTICATION.response,
];

/// The fixed request-topic set the db-processor consumes.
pub const REQUEST_TOPICS: [&str; 8] = [
    BALANCE_QUERY.request,
    TRADE_CREATE.request,
    TRADE_CLOSE.request,
    HOLDINGS_QUERY.request,
    USER_EXISTENCE.request,
    USER_CREATION.request,
    USER_AUTHENTICATION.request,
    TRADE_OUTCOME,
];

/// Fire-and-forget trade outcomes from the matching engine; no response.
pub const TRADE_OUTCOME: &str = "trade-outcome";

/// Fire-and-forget price ticks from the feed poller.
pub const PRICE_UPDATES: &str = "price-updates";
