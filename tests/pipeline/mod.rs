mod cli_test;
mod resolver_test;
