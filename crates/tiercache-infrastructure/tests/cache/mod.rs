mod manager_test;
mod typed_test;
