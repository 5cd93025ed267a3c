mod strict_json;

pub use strict_json::*;
