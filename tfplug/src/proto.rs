//! Protocol buffer types for the Terraform Plugin Protocol v6
//!
//! The protobuf code is generated at build time by tonic-build from
//! `proto/tfplugin6.proto` and included here.
//!
//! Several generated types share names with framework types (DynamicValue,
//! Diagnostic, AttributePath, Schema). Always access them through the
//! `proto::tfplugin6::` prefix to disambiguate.
//!
//! Naming follows prost conventions: RPC request/response types live in
//! snake_case modules (`get_provider_schema::Request`), nested messages in
//! sub-modules (`diagnostic::Severity`), and the service trait is
//! `provider_server::Provider`.

pub mod tfplugin6 {
    tonic::include_proto!("tfplugin6");
}

#[cfg(test)]
mod tests {
    use super::tfplugin6::*;

    #[test]
    fn proto_types_accessible() {
        let _ = DynamicValue::default();
        let _ = Diagnostic::default();
        let _ = AttributePath::default();
        let _ = ServerCapabilities::default();
        let _ = ClientCapabilities::default();
    }

    #[test]
    fn nested_types_accessible() {
        let _ = diagnostic::Severity::Invalid;
        let _ = attribute_path::step::Selector::AttributeName("test".to_string());
        let _ = schema::nested_block::NestingMode::Single;
    }

    #[test]
    fn request_response_types_accessible() {
        let _ = get_provider_schema::Request::default();
        let _ = get_provider_schema::Response::default();
        let _ = read_resource::Request::default();
        let _ = read_resource::Response::default();
    }
}
