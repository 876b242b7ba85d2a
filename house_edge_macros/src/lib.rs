use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote, ToTokens};

/// This macro is added before a method of `HandSimulator` struct in the impl block.
/// Use this macro to first check if current round phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(PlayerActing)]` will make a method first check
/// if current round phase is `PlayerActing`. If not, the method will return
/// `BlackjackError::WrongPhase`.
///
/// The annotated method must return `Result<_, BlackjackError>`, and both
/// `BlackjackError` and `RoundPhase` must be in scope at the call site.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let mut ast: syn::ImplItemFn = syn::parse(item).unwrap();
    let phase = attr.to_string();
    let phase = format_ident!("{}", phase.trim());
    let function_name = ast.sig.ident.to_string();

    let early_return: TokenStream2 = quote! {
        if self.phase != RoundPhase::#phase {
            return Err(BlackjackError::WrongPhase {
                operation: #function_name,
                expected: RoundPhase::#phase,
                actual: self.phase,
            });
        }
    };
    let early_return: syn::Stmt = syn::parse2(early_return).unwrap();
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}
