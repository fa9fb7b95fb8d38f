// (c) 2025 Ross Younger

//! client-side (_initiator_) main loop and supporting structures

mod input;
mod main_loop;

pub(crate) use main_loop::client_main;
