mod api_tests;
mod auth_flow_tests;
mod dashboard_tests;
mod page_tests;
