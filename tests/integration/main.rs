//! Integration tests: whole evaluation cycles driven through in-memory
//! and file-backed feeds.

mod cycle;
mod mock_feed;
