// ABOUTME: Utility modules for common functionality across the application
// ABOUTME: Contains duration parsing shared by configuration and the token service
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

/// Human duration strings ("15m", "7d") to seconds
pub mod duration;
