pub mod provider;
pub mod landmark_model_client;
pub mod face_mesh_client;
pub mod hand_landmark_client;
pub mod pose_landmark_client;
