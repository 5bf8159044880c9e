// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Entités SeaORM (une par table PostgreSQL) + DTO de l'API.
//
// Liste des modules:
//   - users : comptes (email vérifié ou non, profil public)
//   - projects : projets (owner_id immuable)
//   - project_collaborators : rôles owner / editor / viewer par projet
//   - dto : requêtes et réponses JSON
//
// Points d'attention:
//   - Les ids sont des UUID générés côté serveur
//   - Le mot de passe n'est jamais sérialisé (password_hash skip)
//
// ============================================================================

pub mod dto;
pub mod project_collaborators;
pub mod projects;
pub mod users;
