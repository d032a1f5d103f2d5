mod request_reaper;

pub use request_reaper::RequestReaper;
