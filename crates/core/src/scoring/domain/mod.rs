pub mod scoring_client;
