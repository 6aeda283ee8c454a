mod chat_relay;
mod input_gating;
