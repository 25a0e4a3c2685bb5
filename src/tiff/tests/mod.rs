mod test_utils;
mod byte_order_tests;
mod reader_tests;
mod types_tests;
