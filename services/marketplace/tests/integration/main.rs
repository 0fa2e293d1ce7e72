mod helpers;

mod http_test;
mod message_test;
mod payment_test;
mod request_test;
mod webhook_test;
