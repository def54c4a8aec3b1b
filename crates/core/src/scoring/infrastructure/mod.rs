pub mod http_scoring_client;
