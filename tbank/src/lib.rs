//! Bank-support demo: a typed support agent over an in-memory customer store.

mod db;
mod support;

pub use db::{CustomerDatabase, CustomerRecord, DbError};
pub use support::{
    BALANCE_QUERY, BlockCardTool, CustomerBalanceTool, CustomerNameFragment, LOST_CARD_QUERY,
    SUPPORT_INSTRUCTIONS, SupportAgent, SupportDependencies, SupportResult, support_agent,
};
