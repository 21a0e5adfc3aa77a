mod support;

mod orchestrator_tests;
