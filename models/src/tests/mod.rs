mod server_address;
mod timestamp;
mod tracker_info;
