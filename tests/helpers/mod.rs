#![allow(dead_code)]

pub mod activity_builder;
pub mod config_builder;
pub mod mock_settings;
