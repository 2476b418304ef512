pub mod leaderboards;
