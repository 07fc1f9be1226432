pub mod statement_test;
