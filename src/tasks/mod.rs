pub mod live_sync;
