pub mod ledger_writer;
pub mod request_reader;
