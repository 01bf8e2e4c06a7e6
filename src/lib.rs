//! pohod-weather library crate

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod city;
pub mod forecast_service;
pub mod icon;
pub mod options;
pub mod page;
pub mod reporting;
pub mod serve_http;
