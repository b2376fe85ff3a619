/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
#![forbid(unsafe_code)]

//! Herald Macro Library
//!
//! This library provides procedural macros for the Herald actor framework.
//! It includes macros to derive common traits and boilerplate code for
//! Herald messages and agents.
//!
//! # Message Macro
//!
//! The [`herald_message`] macro simplifies creating message types for
//! agent communication:
//!
//! ```ignore
//! #[herald_message]
//! pub struct Ping;
//!
//! #[herald_message]
//! pub struct GetQuote {
//!     pub symbol: String,
//! }
//! ```
//!
//! # Agent Macro
//!
//! The [`herald_agent`] macro simplifies creating agent model types:
//!
//! ```ignore
//! #[herald_agent]
//! pub struct Counter {
//!     count: i32,
//! }
//! ```
//!
//! # Main Entry Point
//!
//! The [`herald_main`] macro provides a convenient entry point for Herald
//! applications:
//!
//! ```ignore
//! use herald::prelude::*;
//!
//! #[herald_main]
//! async fn main() {
//!     let mut app = HeraldApp::launch();
//!     // ... your application logic
//!     app.shutdown_all().await;
//! }
//! ```

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, DeriveInput, ItemFn};

fn has_derive(input: &DeriveInput, trait_name: &str) -> bool {
    input.attrs.iter().any(|attr| {
        if attr.path().is_ident("derive") {
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(trait_name) {
                    found = true;
                }
                Ok(())
            });
            found
        } else {
            false
        }
    })
}

/// Configuration options parsed from `#[herald_agent(...)]` attributes.
#[derive(Default)]
struct AgentConfig {
    /// Skip deriving Default (user will implement it manually).
    no_default: bool,
}

impl AgentConfig {
    /// Parse configuration from attribute tokens.
    fn parse(attr: &TokenStream) -> Self {
        let mut config = Self::default();

        let attr_string = attr.to_string();
        for part in attr_string.split(',') {
            let trimmed = part.trim();
            if trimmed == "no_default" {
                config.no_default = true;
            }
        }

        config
    }
}

/// A procedural macro to derive the necessary traits for a Herald message.
///
/// This macro automatically implements the traits required for a type to
/// be used as a message in the Herald actor framework. It ensures
/// compile-time verification that the message type satisfies
/// `Send + Sync` bounds.
///
/// # Usage
///
/// ```ignore
/// use herald_macro::herald_message;
///
/// #[herald_message]
/// pub struct Ping;
///
/// #[herald_message]
/// pub struct Increment {
///     pub amount: u32,
/// }
/// ```
///
/// This expands to:
/// - `#[derive(Clone, Debug)]` (if not already present)
/// - A compile-time assertion that the type is `Send + Sync + 'static`
#[proc_macro_attribute]
pub fn herald_message(_attr: TokenStream, item: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree.
    let input = parse_macro_input!(item as DeriveInput);

    // Get the name and generics of the struct.
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Determine which traits need to be derived
    let need_clone = !has_derive(&input, "Clone");
    let need_debug = !has_derive(&input, "Debug");

    // Build the list of traits to derive
    let derives = {
        let mut traits = Vec::new();
        if need_clone {
            traits.push(quote!(Clone));
        }
        if need_debug {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    // Generate a unique identifier for the static assertion to avoid conflicts
    let assert_ident = quote::format_ident!("_AssertHeraldMessage_{}", name);

    let expanded = quote! {
        #derives
        #input

        // Compile-time assertion that the message type satisfies Send + Sync + 'static.
        // This catches invalid message types early with clear error messages.
        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + Sync + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    // Return the generated tokens.
    TokenStream::from(expanded)
}

/// A procedural macro to derive boilerplate traits for Herald agents.
///
/// This macro automatically implements the traits required for a type to
/// be used as an agent's model in the Herald framework.
///
/// # Usage
///
/// ```ignore
/// use herald_macro::herald_agent;
///
/// #[herald_agent]
/// pub struct Counter {
///     count: i32,
/// }
/// ```
///
/// This expands to:
/// - `#[derive(Default, Debug)]` (only traits not already present)
/// - A compile-time assertion that the type is `Send + 'static`
///
/// # Options
///
/// ## `no_default`
///
/// Skip deriving `Default` when you need to implement it manually (e.g.,
/// when a field's type doesn't implement `Default`):
///
/// ```ignore
/// use std::io::{stdout, Stdout};
///
/// #[herald_agent(no_default)]
/// struct Printer {
///     out: Stdout,
/// }
///
/// impl Default for Printer {
///     fn default() -> Self {
///         Self { out: stdout() }
///     }
/// }
/// ```
///
/// # Note
///
/// Agent model types must implement `Default` because agents are
/// initialized with their default model before handlers are registered.
/// When using `no_default`, you must provide your own `Default`
/// implementation.
#[proc_macro_attribute]
pub fn herald_agent(attr: TokenStream, item: TokenStream) -> TokenStream {
    // Parse configuration from attributes
    let config = AgentConfig::parse(&attr);

    // Parse the input tokens into a syntax tree.
    let input = parse_macro_input!(item as DeriveInput);

    // Get the name and generics of the struct.
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    // Determine which traits need to be derived
    let need_default = !config.no_default && !has_derive(&input, "Default");
    let need_debug = !has_derive(&input, "Debug");

    // Build the list of traits to derive
    let derives = {
        let mut traits = Vec::new();
        if need_default {
            traits.push(quote!(Default));
        }
        if need_debug {
            traits.push(quote!(Debug));
        }
        if traits.is_empty() {
            quote!()
        } else {
            quote!(#[derive(#(#traits),*)])
        }
    };

    // Generate a unique identifier for the static assertion to avoid conflicts
    let assert_ident = quote::format_ident!("_AssertHeraldAgent_{}", name);

    let expanded = quote! {
        #derives
        #input

        // Compile-time assertion that the agent type satisfies Send + 'static.
        // This catches invalid agent types early with clear error messages.
        #[doc(hidden)]
        #[allow(dead_code, non_camel_case_types, non_snake_case, clippy::needless_lifetimes)]
        const _: () = {
            fn #assert_ident #impl_generics () #where_clause {
                fn assert_bounds<T: Send + 'static>() {}
                assert_bounds::<#name #ty_generics>();
            }
        };
    };

    // Return the generated tokens.
    TokenStream::from(expanded)
}

/// Entry point macro for Herald applications.
///
/// This macro marks an async function as the entry point for a Herald
/// application, setting up the async runtime automatically.
///
/// # Usage
///
/// ```ignore
/// use herald::prelude::*;
///
/// #[herald_main]
/// async fn main() {
///     let mut app = HeraldApp::launch();
///     // ... your application logic
///     app.shutdown_all().await;
/// }
/// ```
///
/// # Configuration
///
/// The macro supports optional configuration for the runtime:
///
/// - `flavor`: The runtime flavor (`"multi_thread"` or `"current_thread"`)
/// - `worker_threads`: Number of worker threads (only for multi-threaded runtime)
///
/// ```ignore
/// // Use single-threaded runtime
/// #[herald_main(flavor = "current_thread")]
/// async fn main() { }
///
/// // Specify worker thread count
/// #[herald_main(worker_threads = 4)]
/// async fn main() { }
/// ```
///
/// The default is a multi-threaded runtime with the default number of
/// worker threads.
#[proc_macro_attribute]
pub fn herald_main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;

    // Validate that the function is async
    if sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            sig.fn_token,
            "the async keyword is missing from the function declaration",
        )
        .to_compile_error()
        .into();
    }

    // Validate function name is main
    if sig.ident != "main" {
        return syn::Error::new_spanned(
            &sig.ident,
            "herald_main can only be applied to the main function",
        )
        .to_compile_error()
        .into();
    }

    // Parse configuration attributes
    let attr_string = attr.to_string();
    let use_current_thread = attr_string.contains("current_thread");

    // Extract worker_threads if specified
    let worker_threads: Option<usize> = attr_string
        .split(',')
        .find(|s| s.contains("worker_threads"))
        .and_then(|s| s.split('=').nth(1).and_then(|v| v.trim().parse().ok()));

    // Generate the runtime builder based on configuration
    let runtime_builder = if use_current_thread {
        quote! {
            ::herald::prelude::tokio::runtime::Builder::new_current_thread()
        }
    } else if let Some(threads) = worker_threads {
        quote! {
            ::herald::prelude::tokio::runtime::Builder::new_multi_thread()
                .worker_threads(#threads)
        }
    } else {
        quote! {
            ::herald::prelude::tokio::runtime::Builder::new_multi_thread()
        }
    };

    // Create the sync function signature (remove async)
    let fn_name = &sig.ident;
    let fn_inputs = &sig.inputs;
    let fn_output = &sig.output;

    let expanded = quote! {
        #(#attrs)*
        #vis fn #fn_name(#fn_inputs) #fn_output {
            #runtime_builder
                .enable_all()
                .build()
                .expect("Failed to build Herald runtime")
                .block_on(async #body)
        }
    };

    TokenStream::from(expanded)
}
