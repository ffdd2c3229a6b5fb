// Disk storage backends

pub mod snapshot_storage;
