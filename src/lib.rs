// ABOUTME: Operator CLI support and process entrypoint for the crisis-detection ensemble service
