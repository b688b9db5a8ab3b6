//! GLSL of the two demo programs.
//!
//! Plain uniforms are grouped into `set = 0` blocks; member names are the
//! uniform names the lighting protocol resolves.

use super::ShaderSources;

const FLAT_COLOR_VS: &str = r#"#version 450

layout(location = 0) in vec3 aPos;
layout(location = 1) in vec3 aColor;

layout(location = 0) out vec3 ourColor;

void main() {
    gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
    ourColor = aColor;
}
"#;

const FLAT_COLOR_FS: &str = r#"#version 450

layout(location = 0) in vec3 ourColor;

layout(location = 0) out vec4 FragColor;

void main() {
    FragColor = vec4(ourColor, 1.0);
}
"#;

const PHONG_VS: &str = r#"#version 450

layout(location = 0) in vec3 vertexPosition_localspace;
layout(location = 1) in vec3 vertexColor;
layout(location = 2) in vec3 vertexNormal;

layout(location = 0) out vec3 fragmentPosition_worldspace;
layout(location = 1) out vec3 fragmentBaseColor;
layout(location = 2) out vec3 fragmentNormal;

layout(set = 0, binding = 0) uniform Transforms {
    mat4 Model;
    mat4 View;
    mat4 Projection;
};

void main() {
    gl_Position = Projection * View * Model * vec4(vertexPosition_localspace, 1.0);

    fragmentPosition_worldspace = vec3(Model * vec4(vertexPosition_localspace, 1.0));
    fragmentBaseColor = vertexColor;
    fragmentNormal = vertexNormal;
}
"#;

const PHONG_FS: &str = r#"#version 450

layout(location = 0) in vec3 fragmentPosition_worldspace;
layout(location = 1) in vec3 fragmentBaseColor;
layout(location = 2) in vec3 fragmentNormal;

layout(location = 0) out vec4 fragmentColor;

layout(set = 0, binding = 1) uniform Lighting {
    vec3 cameraPosition;
    vec3 lightPosition;
    vec3 lightColor;
    float lightPower;
    vec3 materialDiffuse;
    vec3 materialAmbient;
    vec3 materialSpecular;
    float materialShininess;
};

void main() {
    vec3 normal = normalize(fragmentNormal);

    vec3 ambient = materialAmbient * lightColor * materialDiffuse;

    vec3 vectorFtoL = lightPosition - fragmentPosition_worldspace;
    float lightDistance = length(vectorFtoL);
    vec3 lightDirection = normalize(vectorFtoL);
    float diffuseStrength = max(dot(normal, lightDirection), 0.0);
    vec3 diffuse = diffuseStrength * lightColor * materialDiffuse * lightPower
        / (lightDistance * lightDistance);

    vec3 viewDirection = normalize(cameraPosition - fragmentPosition_worldspace);
    vec3 reflectDirection = reflect(-lightDirection, normal);
    float specularStrength = pow(max(dot(viewDirection, reflectDirection), 0.0), materialShininess);
    vec3 specular = specularStrength * lightColor * materialSpecular * lightPower
        / (lightDistance * lightDistance);

    vec3 result = (ambient + diffuse + specular) * fragmentBaseColor;
    fragmentColor = vec4(result, 1.0);
}
"#;

/// Pass-through position, per-vertex color.
pub fn flat_color() -> ShaderSources {
    ShaderSources::new(FLAT_COLOR_VS, FLAT_COLOR_FS)
}

/// Model/view/projection transform plus per-fragment Phong lighting.
pub fn phong() -> ShaderSources {
    ShaderSources::new(PHONG_VS, PHONG_FS)
}
