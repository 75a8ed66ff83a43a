// src/lib.rs

// Declaração dos nossos módulos. O core é uma biblioteca: a camada HTTP
// (rotas, middleware de autenticação) consome os repositórios daqui.
pub mod common;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
