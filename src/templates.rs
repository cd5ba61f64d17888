pub const SAMPLE_SHEET_SCHEMA_JSON: &str = include_str!("../schemas/samplesheet.schema.json");
pub const CONFIG_FILE_SCHEMA_JSON: &str = include_str!("../schemas/configfile.schema.json");
pub const CREATE_DOCKER_IMAGE_SH: &str = include_str!("../scripts/create_docker_image.sh");
pub const CREATE_SINGULARITY_IMAGE_SH: &str =
    include_str!("../scripts/create_singularity_image.sh");
