pub mod operation_reader;
pub mod result_writer;
pub mod seed_reader;
