//! Cursor-stack pagination
//!
//! The API only hands out forward cursors. Going back re-issues the request
//! that reached the previous page, using the cursor stack recorded on the way
//! forward.

pub mod controller;
pub mod cursor;

pub use controller::{
    Completion, FetchPlan, Navigation, PaginationController, PaginationState, Rejection,
};
pub use cursor::Cursor;
