#![forbid(unsafe_code)]

pub mod chapters;
pub mod cli;
pub mod client;
pub mod delivery;
pub mod download;
pub mod error;
pub mod feed;
pub mod formats;
pub mod layout;
pub mod logging;
pub mod order;
pub mod pages;
