//! Handler doubles.

use mockall::mock;
use orrery_protocol::{
    Document, DocumentBuilder, MethodDescriptor, MethodError, MethodHandler, Params,
};

/// Handler that echoes which of its methods was called.
#[derive(Debug, Clone)]
pub struct StubHandler {
    name: &'static str,
    methods: Vec<MethodDescriptor>,
}

impl StubHandler {
    #[must_use]
    pub fn new(name: &'static str, methods: &[&'static str]) -> Self {
        Self {
            name,
            methods: methods
                .iter()
                .map(|method| MethodDescriptor::new(*method, "stubbed method"))
                .collect(),
        }
    }
}

impl MethodHandler for StubHandler {
    fn name(&self) -> &'static str {
        self.name
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        self.methods.clone()
    }

    fn handle(&self, method: &str, _params: &Params) -> Result<Document, MethodError> {
        let mut json = DocumentBuilder::new();
        json.start_object()
            .prop("handler", self.name)
            .prop("method", method)
            .end_object();
        Ok(json.finish()?)
    }
}

/// Handler whose `explode` and `misuse` methods panic.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingHandler;

impl MethodHandler for PanickingHandler {
    fn name(&self) -> &'static str {
        "unstable"
    }

    fn methods(&self) -> Vec<MethodDescriptor> {
        vec![
            MethodDescriptor::new("explode", "Panics outright."),
            MethodDescriptor::new("misuse", "Closes a container it never opened."),
        ]
    }

    fn handle(&self, method: &str, _params: &Params) -> Result<Document, MethodError> {
        if method == "misuse" {
            let mut json = DocumentBuilder::new();
            json.end_object();
            return Ok(json.finish()?);
        }
        panic!("reactor breach");
    }
}

mock! {
    pub Handler {}

    impl MethodHandler for Handler {
        fn name(&self) -> &'static str;
        fn methods(&self) -> Vec<MethodDescriptor>;
        fn handle(&self, method: &str, params: &Params) -> Result<Document, MethodError>;
    }
}
