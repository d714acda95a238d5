pub mod replay_upload;
