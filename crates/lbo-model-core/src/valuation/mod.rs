pub mod dcf;
