pub mod replay_ingest;
