pub mod sse;
pub mod string_util;
