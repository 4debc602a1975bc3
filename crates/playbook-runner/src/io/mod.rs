mod read_inputs;

pub use read_inputs::{read_alert_data, read_playbook_document, write_result_file};
