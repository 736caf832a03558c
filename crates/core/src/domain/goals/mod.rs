pub mod weekly_goals;
