//! Test suites for the relay daemon.

mod dispatch_tests;
