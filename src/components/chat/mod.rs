pub mod ws_manager;
