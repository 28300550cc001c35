// autoform procedural macros

use proc_macro::TokenStream;

use syn::{parse_macro_input, DeriveInput};

mod schema;

/// Derive macro describing a struct as a form schema
///
/// Generates an `autoform::FormSchema` implementation from the struct's
/// `#[form]` and `#[form_field]` attributes. Only fields carrying
/// `#[form_field]` become form items; everything else is ignored.
///
/// # Example
///
/// ```ignore
/// use autoform::{Form, PassValidator};
///
/// #[derive(Default, Form)]
/// #[form(layout = TextLayout)]
/// struct SignupForm {
///     #[form_field(label = "Name", hint = "Full name", order = 1)]
///     name: String,
///
///     #[form_field(key = "mail", label = "Email", order = 2)]
///     email: String,
///
///     #[form_field(label = "Referral code", order = 3, validator = PassValidator)]
///     referral: Option<String>,
///
///     session_id: u64, // not part of the form
/// }
/// ```
///
/// # Struct attribute
///
/// `#[form(...)]` marks the struct as a form. A struct without it still
/// derives, but `FormManager::build` rejects it at runtime.
///
/// - `layout = Type` - default layout provider for fields that name none
/// - `validator = Type` - default validator (otherwise `RequiredValidator`)
/// - `hint_provider = Type` - default hint provider for fields without a static hint
///
/// # Field attribute
///
/// `#[form_field(...)]`:
///
/// - `key = "..."` - lookup and result-map key (defaults to the field name)
/// - `label = "..."`, `hint = "..."` - display metadata
/// - `order = n` - rendering and validation position (integer or float)
/// - `layout = Type`, `validator = Type`, `hint_provider = Type` - per-field strategies
///
/// Annotated field types must implement `Serialize` and `DeserializeOwned`.
#[proc_macro_derive(Form, attributes(form, form_field))]
pub fn derive_form(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    schema::impl_form_schema(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
