pub mod aws_clients;
pub mod records;
pub mod sdk_error;
pub mod storage;
pub mod vision;

#[cfg(test)]
pub mod fakes;
