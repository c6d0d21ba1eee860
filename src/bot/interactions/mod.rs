pub mod dashboard_buttons;
