pub mod fake_admin;
