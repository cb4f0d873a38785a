use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod field_sink;

#[proc_macro_derive(FieldSink, attributes(field, diagnostic))]
pub fn derive_field_sink(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match field_sink::expand_field_sink(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
