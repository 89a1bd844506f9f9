mod find_records;
mod lookup_records;
mod process_record_operations;

pub use find_records::FindRecordsUseCase;
pub use lookup_records::LookupRecordsUseCase;
pub use process_record_operations::ProcessRecordOperationsUseCase;
