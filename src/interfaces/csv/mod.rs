pub mod invoice_writer;
