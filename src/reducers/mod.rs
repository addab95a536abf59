//! Domain reducers.  Each view domain lives in its own module and reports
//! whether it handled a message; the root `update.rs` delegates in order.

pub mod chat;
